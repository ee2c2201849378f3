use crate::harvest::AggregateResult;

/// Formats the deduplicated records as a plain-text report
///
/// One `name: identifier` line per record, followed by the unique count.
pub fn format_report(result: &AggregateResult) -> String {
    let mut report = String::from("--- Final Results ---\n");

    for record in result {
        report.push_str(&format!("{}: {}\n", record.name, record.identifier));
    }

    report.push_str(&format!(
        "\nTotal unique identifiers collected: {}\n",
        result.unique_count()
    ));
    report
}

/// Prints the plain-text report to stdout
pub fn print_report(result: &AggregateResult) {
    print!("{}", format_report(result));
}
