fn main() {
    let args: Vec<String> = std::env::args().collect();

    // Scripted fill -> next -> next -> submit run against the simulated boundary.
    // Prints a transcript and exits 0/1.
    if args.iter().any(|a| a == "--submit-smoke") {
        ppdb_wizard::run_submit_smoke();
        return;
    }

    // Remove the persisted draft for the configured storage key and exit.
    if args.iter().any(|a| a == "--clear-draft") {
        ppdb_wizard::run_clear_draft();
        return;
    }

    // Non-interactive TUI smoke test mode (for automated checks).
    // Renders a single frame for a specific page and exits 0.
    // Usage: --tui-smoke or --tui-smoke=1|2|3|confirm
    if let Some(arg) = args
        .iter()
        .find(|a| a.as_str() == "--tui-smoke" || a.starts_with("--tui-smoke="))
    {
        let target = arg
            .split_once('=')
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.trim().is_empty());
        ppdb_wizard::run_tui_smoke(target);
        return;
    }

    ppdb_wizard::run_tui();
}
