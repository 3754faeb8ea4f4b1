//! # Folio CLI
//!
//! Usage:
//!   folio input.json -o output.pdf
//!   echo '{ ... }' | folio -o output.pdf
//!   folio input.json --layout     (print row and column rectangles as JSON)
//!   folio --example > report.json
//!
//! Set `RUST_LOG=debug` to see the geometry passes.

use std::env;
use std::fs;
use std::io::{self, Read};

use folio::model::{build_document, ReportSpec};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    // Handle --example flag
    if args.iter().any(|a| a == "--example") {
        print!("{}", example_report_json());
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("✗ {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> folio::Result<()> {
    // Read input
    let input = if args.len() > 1 && !args[1].starts_with('-') {
        fs::read_to_string(&args[1])?
    } else {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        buf
    };

    let spec: ReportSpec = serde_json::from_str(&input)?;
    let document = build_document(&spec)?;

    if args.iter().any(|a| a == "--layout") {
        println!("{}", serde_json::to_string_pretty(&document.layout_info())?);
        return Ok(());
    }

    // Parse output path
    let output_path = args
        .windows(2)
        .find(|w| w[0] == "-o")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| "output.pdf".to_string());

    let pdf_bytes = document.to_pdf()?;
    fs::write(&output_path, &pdf_bytes)?;
    eprintln!("✓ Written {} bytes to {}", pdf_bytes.len(), output_path);
    Ok(())
}

fn example_report_json() -> &'static str {
    r##"{
  "unit": "cm",
  "pageSize": "A4",
  "orientation": "Portrait",
  "metadata": {
    "title": "Monthly Budget",
    "author": "Folio"
  },
  "pages": [
    {
      "name": "summary",
      "rows": [
        {
          "name": "header",
          "height": 3,
          "split": [70, 30],
          "regions": [
            {
              "components": [
                {
                  "type": "paragraph",
                  "text": "Monthly Budget",
                  "style": { "font": "Helvetica-Bold", "fontSize": 22 }
                },
                {
                  "type": "paragraph",
                  "text": "Income and spending by category",
                  "style": { "fontSize": 11, "color": "#555555" }
                }
              ]
            },
            {
              "components": [
                {
                  "type": "paragraph",
                  "text": "October 2026",
                  "style": { "align": "Right", "fontSize": 11 }
                }
              ]
            }
          ]
        },
        {
          "name": "body",
          "height": 12,
          "columns": [
            {
              "name": "categories",
              "width": 11,
              "components": [
                {
                  "type": "table",
                  "data": {
                    "columns": ["Category", "Budget", "Spent", "Left"],
                    "rows": [
                      ["Rent", 9500, 9500, 0],
                      ["Groceries", 3000, 3412.5, -412.5],
                      ["Transport", 800, 655, 145],
                      ["Savings", 2500, 2500, 0],
                      ["Total", 15800, 16067.5, -267.5]
                    ]
                  },
                  "flags": {
                    "zebraStripe": true,
                    "totalsLine": true,
                    "negativeHighlightColumn": 4,
                    "columnFormats": ["", "currency", "currency", "currency"]
                  }
                }
              ]
            },
            {
              "name": "notes",
              "width": 6,
              "components": [
                { "type": "spacer", "height": 0.5 },
                {
                  "type": "paragraph",
                  "text": "Groceries ran over budget this month. Rows with a negative remainder are shown in red."
                }
              ]
            }
          ]
        }
      ]
    }
  ]
}
"##
}
