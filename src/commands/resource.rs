//! Lifecycle commands on tracked instances
//!
//! Each command runs exactly one engine step and persists the resulting
//! declared state.

use anyhow::{Context, Result, bail};
use dialoguer::Confirm;
use std::path::Path;

use super::{Session, load_declaration, split_assignment};
use crate::{progress, ui};

fn ensure_untracked(session: &Session, name: &str) -> Result<()> {
    if session.store.contains(name) {
        bail!(
            "An instance named '{name}' is already tracked in {}",
            session.store.path().display()
        );
    }
    Ok(())
}

/// Create a new instance from a declaration file
pub fn create(session: &mut Session, kind: &str, name: &str, config: &Path) -> Result<()> {
    ensure_untracked(session, name)?;
    let reconciler = session.registry.reconciler(kind)?;
    let raw = load_declaration(config)?;
    let mut state = reconciler.schema().declare(&raw)?;

    let result = progress::with_spinner(&format!("Creating {name}"), session.quiet, || {
        reconciler.create(&mut state)
    });

    // A failed refresh still leaves a remote object worth tracking
    if state.exists() {
        session.store.put(name, kind, state.clone());
        session.store.save()?;
    }
    result.with_context(|| format!("Failed to create {name}"))?;

    ui::success(&format!("Created {name} ({})", state.id()));
    if !session.quiet {
        ui::state(name, kind, &state, Some(reconciler.schema()));
    }
    Ok(())
}

/// Refresh a tracked instance; drops it if the remote object is gone
pub fn read(session: &mut Session, name: &str) -> Result<()> {
    let instance = session.store.require(name)?.clone();
    let reconciler = session.registry.reconciler(&instance.kind)?;
    let mut state = instance.state;

    let result = progress::with_spinner(&format!("Reading {name}"), session.quiet, || {
        reconciler.read(&mut state)
    });

    match result {
        Ok(()) => {
            session.store.put(name, &instance.kind, state.clone());
            session.store.save()?;
            ui::state(name, &instance.kind, &state, Some(reconciler.schema()));
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            session.store.remove(name);
            session.store.save()?;
            ui::warn(&format!(
                "{name} ({}) no longer exists remotely; removed from state",
                state.id()
            ));
            Ok(())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {name}")),
    }
}

/// Apply `FIELD=VALUE` changes in place
pub fn update(session: &mut Session, name: &str, assignments: &[String]) -> Result<()> {
    let instance = session.store.require(name)?.clone();
    let reconciler = session.registry.reconciler(&instance.kind)?;

    let pairs = assignments
        .iter()
        .map(|a| split_assignment(a))
        .collect::<Result<Vec<_>>>()?;
    let changes = reconciler.schema().parse_changes(pairs)?;

    let mut state = instance.state;
    let result = progress::with_spinner(&format!("Updating {name}"), session.quiet, || {
        reconciler.update(&mut state, &changes)
    });

    if let Err(e) = result {
        if e.category() == reconcile::ErrorCategory::ConflictingUpdate {
            ui::dim("Fields that force replacement need delete + create");
        }
        return Err(e).with_context(|| format!("Failed to update {name}"));
    }

    session.store.put(name, &instance.kind, state.clone());
    session.store.save()?;
    ui::success(&format!("Updated {name}"));
    if !session.quiet {
        ui::state(name, &instance.kind, &state, Some(reconciler.schema()));
    }
    Ok(())
}

/// Delete the remote object and stop tracking the instance
pub fn delete(session: &mut Session, name: &str, yes: bool) -> Result<()> {
    let instance = session.store.require(name)?.clone();
    let reconciler = session.registry.reconciler(&instance.kind)?;

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Delete {name} ({} {})?",
                instance.kind,
                instance.state.id()
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            ui::info("Aborted");
            return Ok(());
        }
    }

    let mut state = instance.state;
    progress::with_spinner(&format!("Deleting {name}"), session.quiet, || {
        reconciler.delete(&mut state)
    })
    .with_context(|| format!("Failed to delete {name}"))?;

    session.store.remove(name);
    session.store.save()?;
    ui::success(&format!("Deleted {name}"));
    Ok(())
}

/// Track an existing remote object under `name`
pub fn import(session: &mut Session, kind: &str, name: &str, id: &str) -> Result<()> {
    ensure_untracked(session, name)?;
    let reconciler = session.registry.reconciler(kind)?;

    let state = progress::with_spinner(&format!("Importing {id}"), session.quiet, || {
        reconciler.import(id)
    })
    .with_context(|| format!("Failed to import {kind} {id}"))?;

    session.store.put(name, kind, state.clone());
    session.store.save()?;
    ui::success(&format!("Imported {id} as {name}"));
    if !session.quiet {
        ui::state(name, kind, &state, Some(reconciler.schema()));
    }
    Ok(())
}

/// Print every tracked instance
pub fn list(session: &Session) -> Result<()> {
    if session.store.is_empty() {
        ui::info(&format!(
            "No instances tracked in {}",
            session.store.path().display()
        ));
        return Ok(());
    }

    ui::header("Instances");
    for (name, instance) in session.store.instances() {
        ui::kv(
            name,
            &format!(
                "{} {} (updated {})",
                instance.kind,
                instance.state.id(),
                instance.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
            ),
        );
    }
    Ok(())
}
