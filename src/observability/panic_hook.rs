//! Custom panic hook for structured crash reports.
//!
//! When adoptmap crashes the report names:
//!
//! - the analysis phase and customer being processed
//! - how many analyses completed before the crash
//! - the panic message and location
//! - a stack trace when `RUST_BACKTRACE` is set

use super::context::{completed_analyses, get_current_context, AnalysisContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 78;

/// Install the custom panic hook.
///
/// Call early in `main()`, before any analysis begins.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();
    let report = render_report(
        &extract_panic_message(info),
        info.location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column())),
        &context,
        completed_analyses(),
    );
    eprintln!();
    eprint!("{}", report);
    print_backtrace_section();
}

fn render_report(
    message: &str,
    location: Option<String>,
    context: &AnalysisContext,
    completed: usize,
) -> String {
    let mut lines = vec![
        border('╔', '╗'),
        row("                         ADOPTMAP CRASH REPORT"),
        border('╠', '╣'),
        row(&format!("Version: {}", VERSION)),
        row(&format!("Platform: {}", std::env::consts::OS)),
        row(&format!(
            "Time: {}",
            chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )),
        border('╠', '╣'),
        row(&format!("PANIC: {}", message)),
    ];
    if let Some(location) = location {
        lines.push(row(&format!("Location: {}", location)));
    }

    lines.push(border('╠', '╣'));
    lines.push(row("OPERATION CONTEXT:"));
    match &context.phase {
        Some(phase) => lines.push(row(&format!("  Phase: {}", phase))),
        None => lines.push(row("  Phase: (not set - crash occurred outside an analysis)")),
    }
    if let Some(customer) = &context.customer_id {
        lines.push(row(&format!("  Customer: {}", customer)));
    }
    if let Some(metadata) = Span::current().metadata() {
        lines.push(row(&format!("  Span: {}", metadata.name())));
    }
    lines.push(row(&format!("  Analyses completed: {}", completed)));
    lines.push(border('╠', '╣'));

    let mut report = lines.join("\n");
    report.push('\n');
    report
}

fn print_backtrace_section() {
    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("{}", row("STACK TRACE:"));
        eprintln!("{}", border('╚', '╝'));
        eprintln!();
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("{}", row("Run with RUST_BACKTRACE=1 for stack trace"));
        eprintln!("{}", border('╚', '╝'));
    }
}

fn border(left: char, right: char) -> String {
    format!("{}{}{}", left, "═".repeat(WIDTH), right)
}

fn row(text: &str) -> String {
    let inner = WIDTH - 4;
    format!("║  {:<inner$}  ║", truncate(text, inner), inner = inner)
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
