use ratatui::prelude::Color;

const NOT_AVAILABLE: &str = "N/A";

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

fn finite(value: Option<f64>) -> Option<f64> {
  value.filter(|v| v.is_finite())
}

/// Insert thousands separators into a run of ASCII digits
fn group_thousands(digits: &str) -> String {
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, c) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(c);
  }
  out
}

/// Money amount with separators in the given quote currency.
///
/// Two decimals, or up to eight for prices below one unit (trailing zeros
/// past the second decimal are dropped). Currencies without a symbol get
/// their code appended.
pub fn format_currency(value: Option<f64>, currency: &str) -> String {
  let Some(value) = finite(value) else {
    return NOT_AVAILABLE.to_string();
  };

  let sign = if value < 0.0 { "-" } else { "" };
  let abs = value.abs();

  let mut fixed = if value < 1.0 {
    format!("{:.8}", abs)
  } else {
    format!("{:.2}", abs)
  };
  if value < 1.0 {
    while fixed.ends_with('0') && fixed.len() - fixed.find('.').unwrap_or(0) > 3 {
      fixed.pop();
    }
  }

  let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
  let amount = format!("{}.{}", group_thousands(whole), frac);
  match currency_symbol(currency) {
    Some(symbol) => format!("{}{}{}", sign, symbol, amount),
    None => format!("{}{} {}", sign, amount, currency.to_uppercase()),
  }
}

fn currency_symbol(currency: &str) -> Option<&'static str> {
  match currency.to_ascii_lowercase().as_str() {
    "usd" => Some("$"),
    "eur" => Some("€"),
    "gbp" => Some("£"),
    "jpy" => Some("¥"),
    _ => None,
  }
}

/// Compact magnitude with a T/B/M/K suffix
pub fn format_number(value: Option<f64>) -> String {
  let Some(value) = finite(value) else {
    return NOT_AVAILABLE.to_string();
  };

  let sign = if value < 0.0 { "-" } else { "" };
  let abs = value.abs();

  if abs >= 1e12 {
    format!("{}{:.2}T", sign, abs / 1e12)
  } else if abs >= 1e9 {
    format!("{}{:.2}B", sign, abs / 1e9)
  } else if abs >= 1e6 {
    format!("{}{:.2}M", sign, abs / 1e6)
  } else if abs >= 1e3 {
    format!("{}{:.2}K", sign, abs / 1e3)
  } else {
    format!("{:.2}", value)
  }
}

/// Signed percentage, e.g. `+4.20%`
pub fn format_percentage(value: Option<f64>) -> String {
  match finite(value) {
    Some(v) if v >= 0.0 => format!("+{:.2}%", v),
    Some(v) => format!("{:.2}%", v),
    None => NOT_AVAILABLE.to_string(),
  }
}

/// Plain count with separators, used for supplies
pub fn format_amount(value: Option<f64>) -> String {
  match finite(value) {
    Some(v) => {
      let sign = if v < 0.0 { "-" } else { "" };
      format!("{}{}", sign, group_thousands(&format!("{:.0}", v.abs())))
    }
    None => NOT_AVAILABLE.to_string(),
  }
}

/// Green for gains, red for losses
pub fn change_color(value: Option<f64>) -> Color {
  match finite(value) {
    Some(v) if v > 0.0 => Color::Green,
    Some(v) if v < 0.0 => Color::Red,
    _ => Color::Gray,
  }
}
