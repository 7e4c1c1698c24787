use api_types::item::ItemSummary;
use catalog::{CategoryMenu, FilterState, SearchView};

/// Prints results to stdout and errors to stderr.
#[derive(Debug, Default)]
pub struct TerminalView;

impl SearchView for TerminalView {
    fn set_items(&self, items: Vec<ItemSummary>) {
        if items.is_empty() {
            println!("no items");
            return;
        }
        for item in &items {
            println!("{}", format_item(item));
        }
        println!("{} item(s)", items.len());
    }

    fn set_categories(&self, menu: CategoryMenu) {
        println!("{}", format_menu(&menu));
    }

    fn notify(&self, message: String) {
        eprintln!("{}", format_error(&message));
    }
}

pub fn format_item(item: &ItemSummary) -> String {
    format!(
        "#{:<6} {:<32} {:>10}  {:<8}  {}",
        item.id,
        item.name,
        item.price,
        item.status.as_str(),
        item.category_name
    )
}

pub fn format_menu(menu: &CategoryMenu) -> String {
    let mut lines = vec!["categories:".to_string()];
    for option in &menu.options {
        let mark = if option.selector == menu.selected { '*' } else { ' ' };
        lines.push(format!(" {mark} {:>4}  {}", option.selector.to_string(), option.name));
    }
    if !menu.selected_known() {
        lines.push(format!(" * {:>4}  (unknown)", menu.selected.to_string()));
    }
    lines.join("\n")
}

pub fn format_filter(filter: &FilterState) -> String {
    format!(
        "category={} keyword={:?} price={}..{} soldout={}",
        filter.category,
        filter.keyword,
        filter.price_min,
        filter.price_max,
        if filter.include_sold_out { "on" } else { "off" }
    )
}

pub fn format_error(message: &str) -> String {
    format!("[error] {message}")
}
