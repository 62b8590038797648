//! Subcommand handlers

pub mod exec;
pub mod http;

use breakwater_core::CommandRegistry;

/// Print the final breaker state of every command that saw traffic
pub(crate) fn print_stats(registry: &CommandRegistry) {
    let stats = registry.breakers().all_stats();
    if stats.is_empty() {
        return;
    }

    println!(
        "{:<24} {:<10} {:>6} {:>8} {:>9} {:>7}",
        "command", "state", "calls", "failures", "rejected", "error%"
    );
    for (name, stats) in stats {
        println!(
            "{:<24} {:<10} {:>6} {:>8} {:>9} {:>6.1}%",
            name,
            stats.state.to_string(),
            stats.total_calls,
            stats.total_failures,
            stats.total_rejections,
            stats.error_percentage()
        );
    }
}
