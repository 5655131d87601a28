use super::open_repository;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Color, Table};
use serde_json::json;
use smartlist_config::PathManager;
use smartlist_core::ListRepository;
use smartlist_models::{ListDefinition, ListId, ScanState};

pub async fn run_lists(output: &Output) -> Result<()> {
    let repository = open_repository(&PathManager::default());
    let lists = repository.list_all().await?;

    if !output.is_human() {
        output.json(&serde_json::to_value(&lists)?);
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }
    if lists.is_empty() {
        output.info("No lists stored yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Kind", "Owner", "Mode", "State", "Process", "Last processed", "Tracked",
    ]);
    for list in &lists {
        let state = Cell::new(list.scan_state.to_string()).fg(match list.scan_state {
            ScanState::None => Color::Green,
            ScanState::Scheduled => Color::Cyan,
            ScanState::Updating => Color::Yellow,
        });
        let process = if list.process {
            Cell::new("on")
        } else {
            Cell::new("paused").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(list.id),
            Cell::new(&list.name),
            Cell::new(list.kind.as_str()),
            Cell::new(owner_label(list)),
            Cell::new(mode_label(list)),
            state,
            process,
            Cell::new(last_processed_label(list)),
            Cell::new(list.tracked.len()),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
    Ok(())
}

/// Clear the pause left behind by an auth failure
pub async fn run_resume(list_id: ListId, output: &Output) -> Result<()> {
    let repository = open_repository(&PathManager::default());
    let mut list = load_list(repository.as_ref(), list_id).await?;
    if list.process {
        output.info(format!("List {} is not paused.", list_id));
        return Ok(());
    }
    list.process = true;
    repository.update(&list).await?;
    output.success(format!("List {} ({}) resumed.", list_id, list.name));
    Ok(())
}

/// Return a list stuck in `scheduled` or `updating` to idle
pub async fn run_reset(list_id: ListId, output: &Output) -> Result<()> {
    let repository = open_repository(&PathManager::default());
    let mut list = load_list(repository.as_ref(), list_id).await?;
    if list.scan_state.is_idle() {
        output.info(format!("List {} is already idle.", list_id));
        return Ok(());
    }
    let previous = list.scan_state;
    list.scan_state = ScanState::None;
    repository.update(&list).await?;
    output.success(format!("List {} reset from {} to idle.", list_id, previous));
    Ok(())
}

pub async fn run_report(list_id: ListId, output: &Output) -> Result<()> {
    let repository = open_repository(&PathManager::default());
    let list = load_list(repository.as_ref(), list_id).await?;

    let Some(report) = &list.roster_report else {
        output.info(format!("List {} has no roster report.", list_id));
        return Ok(());
    };

    if !output.is_human() {
        output.json(&json!({
            "list_id": list.id,
            "lines": report.lines(),
            "mismatches": report.mismatches().count(),
        }));
        return Ok(());
    }
    for line in report.lines() {
        output.info(line);
    }
    output.info(format!(
        "{} matched, {} with a different title or year",
        report.len(),
        report.mismatches().count()
    ));
    Ok(())
}

async fn load_list(repository: &dyn ListRepository, list_id: ListId) -> Result<ListDefinition> {
    repository
        .get(list_id)
        .await?
        .ok_or_else(|| color_eyre::eyre::eyre!("List {} not found", list_id))
}

fn owner_label(list: &ListDefinition) -> String {
    if list.owner.is_privileged {
        format!("{} ★", list.owner.username)
    } else {
        list.owner.username.clone()
    }
}

fn mode_label(list: &ListDefinition) -> &'static str {
    match (list.manual_roster(), list.effective_reverse_filters()) {
        (Some(_), _) => "roster",
        (None, Some(_)) => "filters + reverse",
        (None, None) => "filters",
    }
}

fn last_processed_label(list: &ListDefinition) -> String {
    list.last_processed
        .map(|at| at.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "never".to_string())
}
