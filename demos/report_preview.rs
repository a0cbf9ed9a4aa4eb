//! Resolves a small invoice layout against sample data and prints the
//! substituted tree, the way the editor preview consumes the engine.
//!
//! Run with: `cargo run --example report_preview`

use serde_json::json;

fn main() {
    env_logger::init();

    let template = json!({
        "type": "Page",
        "children": [
            { "type": "Heading", "content": "Invoice {{invoice.number}}" },
            { "type": "Text", "content": "Customer: {{customer.name | uppercase}}" },
            { "type": "Text", "content": "CPF: {{customer.document | cpf}}" },
            { "type": "Text", "content": "Issued: {{invoice.date | date:\"DD/MM/YYYY\"}}" },
            { "type": "Text", "content": "Total: {{invoice.total | currency:\"BRL\"}}" },
            { "type": "Text", "content": "Change: {{invoice.delta | sign}} ({{invoice.delta | abs | percent:1}})" },
            { "type": "Text", "content": "Status: {{if(invoice.paid, 'PAID', 'PENDING')}}" },
            { "type": "List", "items": "{{invoice.lines}}" },
            { "type": "Text", "content": "Notes: {{ifEmpty(invoice.notes, '—')}}" },
            { "type": "Text", "content": "This stays visible: {{not.bound}}" }
        ]
    });

    let data = json!({
        "invoice": {
            "number": "2024-091",
            "date": "2024-03-09",
            "total": 1532.4,
            "delta": 0.0233,
            "paid": false,
            "lines": ["Design review", "Print run"],
            "notes": ""
        },
        "customer": { "name": "Acme Ltda", "document": "14654044817" }
    });

    let resolved = bindery::resolve_bindings(&template, &data);
    println!("{}", serde_json::to_string_pretty(&resolved).unwrap());
}
