use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Row, Table};
use pricerule::parser::split_formula;
use pricerule::{Condition, Definition};

pub struct Formatter {}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    pub fn new() -> Self {
        Self {}
    }

    /// Canonical text followed by one condition table per clause
    pub fn format_definition(&self, definition: &Definition, canonical: &str) -> String {
        let mut output = String::new();
        output.push_str(canonical);
        output.push_str("\n\n");

        if definition.conditions.is_empty() && definition.additional_clauses.is_empty() {
            output.push_str(&format!("└─ = {}\n", definition.formula));
            return output;
        }

        output.push_str(&self.format_clause(1, &definition.conditions, &definition.formula));
        for (index, clause) in definition.additional_clauses.iter().enumerate() {
            output.push_str(&format!("{}\n", clause.connector));
            output.push_str(&self.format_clause(index + 2, &clause.conditions, &clause.formula));
        }
        output
    }

    fn format_clause(&self, number: usize, conditions: &[Condition], formula: &str) -> String {
        let mut output = format!("Clause {}\n", number);
        if !conditions.is_empty() {
            output.push_str(&self.format_conditions_table(conditions));
            output.push('\n');
        }

        let (then_part, else_part) = split_formula(formula);
        match else_part {
            Some(else_part) => {
                output.push_str(&format!("├─ THEN {}\n", then_part));
                output.push_str(&format!("└─ ELSE {}\n", else_part));
            }
            None => output.push_str(&format!("└─ THEN {}\n", then_part)),
        }
        output
    }

    pub fn format_conditions_table(&self, conditions: &[Condition]) -> String {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(Row::from(vec![
            Cell::new("#").set_alignment(CellAlignment::Right),
            Cell::new("Connector").set_alignment(CellAlignment::Left),
            Cell::new("Not").set_alignment(CellAlignment::Left),
            Cell::new("Left").set_alignment(CellAlignment::Left),
            Cell::new("Comparator").set_alignment(CellAlignment::Left),
            Cell::new("Right").set_alignment(CellAlignment::Left),
        ]));

        for (index, condition) in conditions.iter().enumerate() {
            let connector = condition
                .connector
                .map(|c| c.to_string())
                .unwrap_or_default();
            table.add_row(vec![
                Cell::new(index + 1).set_alignment(CellAlignment::Right),
                Cell::new(connector),
                Cell::new(if condition.negated { "NOT" } else { "" }),
                Cell::new(condition.left.to_string()),
                Cell::new(condition.comparator.symbol()),
                Cell::new(condition.right.to_string()),
            ]);
        }

        table.to_string()
    }

    /// Whole numbers print without a fractional part
    pub fn format_number(&self, value: f64) -> String {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
            format!("{}", value as i64)
        } else {
            format!("{}", value)
        }
    }
}
