pub mod footer;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use utils::{
  change_color, format_amount, format_currency, format_number, format_percentage, truncate,
};
