//! Printable HTML receipts.

use std::fmt::Write;

use crate::models::Order;

pub const RESTAURANT_NAME: &str = "Food Order";

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minor units to a two-decimal amount, e.g. `1250` to `12.50`.
pub fn format_money(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

pub fn render_receipt(order: &Order) -> String {
    let mut rows = String::new();
    for item in &order.items {
        // Writing to a String cannot fail.
        let _ = write!(
            rows,
            "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            escape_html(&item.name),
            item.quantity,
            format_money(item.unit_price),
            format_money(item.line_total),
        );
    }

    let notes = order
        .notes
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(|n| format!("<p class=\"notes\"><strong>Notes:</strong> {}</p>", escape_html(n)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Receipt {short_id}</title>
<style>
body {{ font-family: monospace; max-width: 28rem; margin: 1rem auto; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ padding: 0.2rem 0; text-align: left; }}
.num {{ text-align: right; }}
.total td {{ border-top: 1px dashed #000; font-weight: bold; }}
@media print {{ button {{ display: none; }} }}
</style>
</head>
<body>
<h1>{restaurant}</h1>
<p>Order <strong>#{short_id}</strong><br>Placed {placed}<br>Status: {status}</p>
<p>{name}<br>{phone}<br>{address}</p>
<table>
<thead><tr><th>Item</th><th class="num">Qty</th><th class="num">Price</th><th class="num">Amount</th></tr></thead>
<tbody>{rows}</tbody>
<tfoot><tr class="total"><td colspan="3">Total</td><td class="num">{total}</td></tr></tfoot>
</table>
{notes}
<button onclick="window.print()">Print</button>
</body>
</html>
"#,
        short_id = short_id(order),
        restaurant = RESTAURANT_NAME,
        placed = order.created_at.format("%Y-%m-%d %H:%M UTC"),
        status = order.status,
        name = escape_html(&order.customer_name),
        phone = escape_html(&order.customer_phone),
        address = escape_html(&order.delivery_address),
        rows = rows,
        total = format_money(order.total),
        notes = notes,
    )
}

fn short_id(order: &Order) -> String {
    order.id.simple().to_string()[..8].to_uppercase()
}
