use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use nfe_cli::types::AuditResult;
use nfe_report::{ABSENT, NO_DIVERGENCE_MESSAGE, REPORT_HEADERS, completion_message, report_row};

pub fn print_summary(result: &AuditResult) {
    let outcome = &result.outcome;
    println!(
        "Regras: {} ({} CFOPs)",
        result.rules_path.display(),
        result.rule_count
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Documentos"),
        header_cell("Processados"),
        header_cell("Ilegíveis"),
        header_cell("Itens"),
        header_cell("Divergências"),
    ]);
    apply_table_style(&mut table);
    for index in 0..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(result.documents_found),
        Cell::new(outcome.documents_processed),
        count_cell(outcome.document_errors.len(), Color::Yellow),
        Cell::new(outcome.lines_checked),
        count_cell(outcome.divergences.len(), Color::Red),
    ]);
    println!("{table}");

    if outcome.divergences.is_empty() {
        println!("{NO_DIVERGENCE_MESSAGE}");
    } else {
        print_divergence_table(result);
        println!("{}", completion_message(outcome.divergences.len()));
    }

    if let Some(path) = &result.report {
        println!("Relatório: {}", path.display());
    }

    if !outcome.document_errors.is_empty() {
        eprintln!("Documentos ilegíveis:");
        for error in &outcome.document_errors {
            eprintln!("- {error}");
        }
    }
}

fn print_divergence_table(result: &AuditResult) {
    let mut table = Table::new();
    table.set_header(REPORT_HEADERS.iter().copied().map(header_cell).collect::<Vec<_>>());
    apply_divergence_table_style(&mut table);
    for divergence in &result.outcome.divergences {
        let row = report_row(divergence);
        let cells: Vec<Cell> = row
            .into_iter()
            .enumerate()
            .map(|(index, value)| match index {
                _ if value == ABSENT => dim_cell(value),
                0 => Cell::new(value).add_attribute(Attribute::Bold),
                9 => Cell::new(value).fg(Color::Red),
                _ => Cell::new(value),
            })
            .collect();
        table.add_row(cells);
    }
    println!();
    println!("Divergências:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_divergence_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(180);
    if table.column_count() >= 10 {
        let mut constraints = vec![ColumnConstraint::LowerBoundary(Width::Fixed(6)); 9];
        constraints.push(ColumnConstraint::UpperBoundary(Width::Percentage(45)));
        table.set_constraints(constraints);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
