use clap::{Args, Parser, Subcommand, ValueEnum};
use lexi_page::HeadlessPage;
use lexi_page::page::Element;
use lexi_types::{Rect, Viewport};

#[derive(Parser, Debug)]
#[command(name = "lexi", version, about = "Select a word, get its definition in a popup")]
pub struct Cli {
    /// Log as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Select TEXT on a headless page, press the shortcut, print the popup
    Lookup(LookupArgs),
    /// Turn lookups on
    Enable,
    /// Turn lookups off
    Disable,
    /// Show whether lookups are on and which shortcut triggers them
    Status,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Text the user has selected
    pub text: String,

    /// Viewport as WIDTHxHEIGHT
    #[arg(long, default_value = "1280x800", value_parser = parse_size)]
    pub viewport: (f64, f64),

    /// Selection box in viewport coordinates, X,Y,WIDTH,HEIGHT
    #[arg(long, default_value = "560,380,160,20", value_parser = parse_rect)]
    pub selection: Rect,

    /// Scroll offset as X,Y
    #[arg(long, default_value = "0,0", value_parser = parse_pair)]
    pub scroll: (f64, f64),

    /// Computed background color of the page body
    #[arg(long, default_value = "rgb(255, 255, 255)")]
    pub background: String,

    /// Class on the root element, e.g. `dark`
    #[arg(long)]
    pub dark_class: Option<String>,

    /// Override the dictionary timeout
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Simulate a page that refuses renderer injection
    #[arg(long)]
    pub restricted: bool,

    /// Dismiss the popup this way after the lookup, before printing
    #[arg(long, value_enum)]
    pub dismiss: Option<Dismiss>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dismiss {
    Escape,
    ClickOutside,
    Close,
    Unload,
}

impl LookupArgs {
    pub fn page(&self) -> HeadlessPage {
        let (width, height) = self.viewport;
        let (scroll_x, scroll_y) = self.scroll;

        let page = HeadlessPage::new()
            .with_viewport(Viewport {
                width,
                height,
                scroll_x,
                scroll_y,
            })
            .with_background(&self.background)
            .with_selection(&self.text, self.selection);

        match &self.dark_class {
            Some(class) => page.with_class(Element::Root, class),
            None => page,
        }
    }
}

fn parse_numbers<const N: usize>(s: &str, sep: char) -> Result<[f64; N], String> {
    let parts: Vec<f64> = s
        .split(sep)
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;
    parts
        .try_into()
        .map_err(|_| format!("expected {N} numbers separated by '{sep}'"))
}

fn parse_size(s: &str) -> Result<(f64, f64), String> {
    let [w, h] = parse_numbers::<2>(s, 'x')?;
    Ok((w, h))
}

fn parse_pair(s: &str) -> Result<(f64, f64), String> {
    let [x, y] = parse_numbers::<2>(s, ',')?;
    Ok((x, y))
}

fn parse_rect(s: &str) -> Result<Rect, String> {
    let [x, y, w, h] = parse_numbers::<4>(s, ',')?;
    Ok(Rect::new(x, y, w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geometry_flags() {
        assert_eq!(parse_size("1024x768"), Ok((1024.0, 768.0)));
        assert_eq!(parse_pair("0, 250"), Ok((0.0, 250.0)));
        assert_eq!(parse_rect("1,2,3,4"), Ok(Rect::new(1.0, 2.0, 3.0, 4.0)));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_size("wide").is_err());
    }

    #[test]
    fn lookup_command_defaults() {
        let cli = Cli::try_parse_from(["lexi", "lookup", "serendipity"]).unwrap();
        let Command::Lookup(args) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(args.viewport, (1280.0, 800.0));
        assert_eq!(args.selection, Rect::new(560.0, 380.0, 160.0, 20.0));
        assert!(args.dark_class.is_none());
        assert!(!args.restricted);
    }

    #[test]
    fn dismiss_flag_uses_kebab_case() {
        let cli =
            Cli::try_parse_from(["lexi", "lookup", "word", "--dismiss", "click-outside"]).unwrap();
        let Command::Lookup(args) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(args.dismiss, Some(Dismiss::ClickOutside));
    }
}
