//! Options shared by the commands that open a worksheet.

use reckon_sheet::SheetConfig;

/// Parsed `<file> [--background] [--recursion-limit N]` arguments.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SheetOptions {
    pub path: Option<String>,
    /// Calculate on the worker thread.
    pub background: bool,
    pub recursion_limit: Option<usize>,
}

impl SheetOptions {
    pub fn config(&self) -> SheetConfig {
        let mut builder = SheetConfig::builder().background(self.background);
        if let Some(limit) = self.recursion_limit {
            builder = builder.recursion_limit(limit);
        }
        builder.build()
    }
}

/// Parse the arguments after the command name.
pub fn parse_sheet_options(args: &[String]) -> Result<SheetOptions, String> {
    let mut options = SheetOptions::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if let Some(value) = arg.strip_prefix("--recursion-limit=") {
            options.recursion_limit = Some(parse_limit(value)?);
            i += 1;
            continue;
        }
        match arg {
            "--background" | "-b" => options.background = true,
            "--recursion-limit" => {
                let Some(value) = args.get(i + 1) else {
                    return Err("--recursion-limit needs a value".to_string());
                };
                options.recursion_limit = Some(parse_limit(value)?);
                i += 1;
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option '{arg}'")),
            _ if options.path.is_none() => options.path = Some(arg.to_string()),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
        i += 1;
    }
    Ok(options)
}

fn parse_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(limit) if limit > 0 => Ok(limit),
        _ => Err(format!("invalid recursion limit '{value}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn path_and_flags() {
        let options =
            parse_sheet_options(&args(&["sheet.rk", "--background", "--recursion-limit", "50"]));
        assert_eq!(
            options,
            Ok(SheetOptions {
                path: Some("sheet.rk".to_string()),
                background: true,
                recursion_limit: Some(50),
            })
        );
    }

    #[test]
    fn inline_limit() {
        let options = parse_sheet_options(&args(&["--recursion-limit=7", "a.rk"]));
        assert_eq!(options.map(|o| o.recursion_limit), Ok(Some(7)));
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_sheet_options(&args(&["a.rk", "b.rk"])).is_err());
        assert!(parse_sheet_options(&args(&["a.rk", "--fast"])).is_err());
        assert!(parse_sheet_options(&args(&["a.rk", "--recursion-limit"])).is_err());
        assert!(parse_sheet_options(&args(&["a.rk", "--recursion-limit=0"])).is_err());
    }

    #[test]
    fn config_follows_options() {
        let options = SheetOptions {
            path: None,
            background: true,
            recursion_limit: Some(12),
        };
        let config = options.config();
        assert!(config.background());
        assert_eq!(config.engine().recursion_limit(), 12);
    }
}
