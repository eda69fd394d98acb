use clap::Parser;
use pact_calendar::MonthRef;

#[derive(Parser, Debug)]
#[command(version, about = "Show a month of pacts and the most recent pact list")]
pub struct Cli {
    /// Month to show, as YYYY-MM. Defaults to the current month.
    #[arg(value_name = "YYYY-MM", value_parser = MonthRef::parse)]
    pub month: Option<MonthRef>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_month_is_optional() {
        let cli = Cli::try_parse_from(["pact"]).unwrap();
        assert_eq!(cli.month, None);
    }

    #[test]
    fn test_month_argument_parsed() {
        let cli = Cli::try_parse_from(["pact", "2025-03"]).unwrap();
        assert_eq!(cli.month, MonthRef::new(2025, 3));
    }

    #[test]
    fn test_bad_month_is_usage_error() {
        let err = Cli::try_parse_from(["pact", "2025-13"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_help_is_not_a_month() {
        let err = Cli::try_parse_from(["pact", "--help"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }
}
