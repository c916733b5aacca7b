pub mod banners;
pub mod header;
pub mod next_prayer;
pub mod prayers;
pub mod reminders;
pub mod statusbar;
