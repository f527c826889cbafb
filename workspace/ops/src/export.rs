//! CSV projection of report results.
//!
//! Any row set produced by the report queries can be rendered to CSV for
//! download or further processing. Fields containing separators, quotes
//! or newlines are quoted per RFC 4180.

use common::{
    CategoryRevenue, DailySales, FinancialSummary, MonthlyRevenue, MonthlySummary, ProductRevenue,
    SaleWithProduct,
};
use model::entities::product;

/// A row type that knows how to render itself as CSV.
pub trait CsvRecord {
    /// Comma-separated column names.
    fn header() -> &'static str;
    /// The field values of one row, unescaped.
    fn fields(&self) -> Vec<String>;
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders a header line plus one line per row, `\r\n` separated.
pub fn to_csv<T: CsvRecord>(rows: &[T]) -> String {
    let mut out = String::new();
    out.push_str(T::header());
    out.push_str("\r\n");
    for row in rows {
        let line: Vec<String> = row.fields().iter().map(|f| escape(f)).collect();
        out.push_str(&line.join(","));
        out.push_str("\r\n");
    }
    out
}

impl CsvRecord for product::Model {
    fn header() -> &'static str {
        "id,name,category,unit_price,stock,created_at"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.unit_price.to_string(),
            self.stock.to_string(),
            self.created_at.to_rfc3339(),
        ]
    }
}

impl CsvRecord for CategoryRevenue {
    fn header() -> &'static str {
        "category,revenue"
    }

    fn fields(&self) -> Vec<String> {
        vec![self.category.clone(), self.revenue.to_string()]
    }
}

impl CsvRecord for ProductRevenue {
    fn header() -> &'static str {
        "product_id,name,category,quantity_sold,revenue"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.product_id.to_string(),
            self.name.clone(),
            self.category.clone(),
            self.quantity_sold.to_string(),
            self.revenue.to_string(),
        ]
    }
}

impl CsvRecord for MonthlySummary {
    fn header() -> &'static str {
        "year,month,income,expense,net_profit"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.month.to_string(),
            self.income.to_string(),
            self.expense.to_string(),
            self.net_profit.to_string(),
        ]
    }
}

impl CsvRecord for FinancialSummary {
    fn header() -> &'static str {
        "income,expense,profit"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.income.to_string(),
            self.expense.to_string(),
            self.profit.to_string(),
        ]
    }
}

impl CsvRecord for DailySales {
    fn header() -> &'static str {
        "date,count,revenue"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.date.to_string(),
            self.count.to_string(),
            self.revenue.to_string(),
        ]
    }
}

impl CsvRecord for MonthlyRevenue {
    fn header() -> &'static str {
        "year,month,count,revenue"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.year.to_string(),
            self.month.to_string(),
            self.count.to_string(),
            self.revenue.to_string(),
        ]
    }
}

impl CsvRecord for SaleWithProduct {
    fn header() -> &'static str {
        "id,product_id,product_name,customer_name,quantity,total_price,sale_date"
    }

    fn fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.product_id.to_string(),
            self.product_name.clone(),
            self.customer_name.clone(),
            self.quantity.to_string(),
            self.total_price.to_string(),
            self.sale_date.to_rfc3339(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn renders_header_and_rows() {
        let rows = vec![
            CategoryRevenue {
                category: "Electronics".to_string(),
                revenue: Decimal::new(25_000, 2),
            },
            CategoryRevenue {
                category: "Clothing".to_string(),
                revenue: Decimal::new(10_000, 2),
            },
        ];

        let csv = to_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "category,revenue");
        assert_eq!(lines[1], "Electronics,250.00");
        assert_eq!(lines[2], "Clothing,100.00");
    }

    #[test]
    fn quotes_fields_containing_separators() {
        let rows = vec![CategoryRevenue {
            category: "Food, drink & \"misc\"".to_string(),
            revenue: Decimal::new(100, 2),
        }];

        let csv = to_csv(&rows);
        assert!(csv.contains("\"Food, drink & \"\"misc\"\"\",1.00"));
    }

    #[test]
    fn empty_input_still_yields_the_header() {
        let csv = to_csv::<CategoryRevenue>(&[]);
        assert_eq!(csv, "category,revenue\r\n");
    }
}
