use crate::fields::{self, Record};
use crate::format::{PT_BR, format_currency};

const NO_TITLE: &str = "Sem título";

fn title(property: &Record) -> String {
    fields::text(property, &["title"]).unwrap_or_else(|| NO_TITLE.to_string())
}

/// A monetary field counts only when present and strictly positive.
fn price(property: &Record, name: &str) -> Option<f64> {
    fields::number(property, &[name]).filter(|value| *value > 0.0)
}

/// One-line listing entry: `• {title} — {neighborhood} Venda R$ X | Aluguel R$ Y`.
#[must_use]
pub fn property_summary(property: &Record) -> String {
    let place = fields::text(property, &["addressNeighborhood"])
        .or_else(|| fields::text(property, &["addressCity"]))
        .map(|place| format!(" — {place}"))
        .unwrap_or_default();

    let prices: Vec<String> = [("Venda", "valueSale"), ("Aluguel", "valueRent")]
        .into_iter()
        .filter_map(|(label, name)| {
            price(property, name).map(|value| format!("{label} {}", format_currency(value, &PT_BR)))
        })
        .collect();

    let line = format!("• {}{place} {}", title(property), prices.join(" | "));
    line.trim_end().to_string()
}

/// Multi-line detail: title, description, address, prices and room facts.
#[must_use]
pub fn property_detail(property: &Record) -> String {
    let description = fields::text(property, &["description"])
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| "Sem descrição.".to_string());

    let address: Vec<String> = [
        "addressStreet",
        "addressNumber",
        "addressNeighborhood",
        "addressCity",
        "addressState",
    ]
    .into_iter()
    .filter(|name| fields::is_set(property, &[*name]))
    .filter_map(|name| fields::text(property, &[name]))
    .collect();
    let address = if address.is_empty() {
        "Não informado".to_string()
    } else {
        address.join(", ")
    };

    let prices: Vec<String> = [("Venda", "valueSale"), ("Aluguel", "valueRent")]
        .into_iter()
        .filter_map(|(label, name)| {
            price(property, name).map(|value| format!("{label}: {}", format_currency(value, &PT_BR)))
        })
        .collect();
    let prices = if prices.is_empty() {
        "Valor não informado.".to_string()
    } else {
        prices.join("\n")
    };

    let mut facts = Vec::new();
    for (name, unit) in [
        ("bedrooms", "quartos"),
        ("bathrooms", "banheiros"),
        ("parkingSpaces", "vagas"),
    ] {
        if fields::is_set(property, &[name])
            && let Some(count) = fields::text(property, &[name])
        {
            facts.push(format!("{count} {unit}"));
        }
    }
    if let Some(area) = fields::number(property, &["areaM2"]).filter(|area| *area > 0.0) {
        facts.push(format!("{area:.0} m²"));
    }

    let detail = format!(
        "{}\n\n{description}\n\nEndereço: {address}\n{prices}\n{}",
        title(property),
        facts.join(" | ")
    );
    detail.trim().to_string()
}
