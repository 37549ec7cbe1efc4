//! Lists the marketplaces the engine can search.

use crate::pricing::RateTable;
use crate::sources::Marketplace;

/// Renders the marketplace catalogue and the groups that select it.
pub fn list_sources(rates: &RateTable) -> String {
    let default_ids: Vec<String> =
        Marketplace::international().iter().map(Marketplace::id).collect();

    let mut lines = Vec::new();
    lines.push("Supported sources:".to_string());
    lines.push(String::new());
    lines.push(format!(
        "{:<14} {:<14} {:<9} {:<10} {}",
        "Id", "Label", "Currency", "Rate", "Base URL"
    ));
    lines.push(format!("{:-<14} {:-<14} {:-<9} {:-<10} {:-<30}", "", "", "", "", ""));

    for marketplace in Marketplace::all() {
        let currency = marketplace.currency();
        let rate = rates
            .rate(currency)
            .map(|r| format!("{:.6}", r))
            .unwrap_or_else(|| "1 (?)".to_string());
        let marker = if default_ids.contains(&marketplace.id()) { " *" } else { "" };

        lines.push(format!(
            "{:<14} {:<14} {:<9} {:<10} {}{}",
            marketplace.id(),
            marketplace.label(),
            currency,
            rate,
            marketplace.base_url(),
            marker
        ));
    }

    lines.push(String::new());
    lines.push("* default (group: international)".to_string());
    lines.push("Groups: international, local, all".to_string());

    lines.join("\n")
}
