pub mod footer;
pub mod header;
pub mod picture;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use picture::{draw_picture, picture_height, picture_width};
pub use utils::{score_color, source_color, truncate};
