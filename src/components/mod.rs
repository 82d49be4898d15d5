pub mod category_panel;
pub mod day_view;
pub mod event_form;
pub mod help;
pub mod list_view;
pub mod month_view;
pub mod sign_in;
pub mod status_bar;
pub mod timezone_picker;

pub use category_panel::CategoryPanel;
pub use day_view::DayView;
pub use event_form::EventForm;
pub use list_view::ListView;
pub use month_view::MonthView;
pub use sign_in::SignInForm;
pub use status_bar::StatusBar;
pub use timezone_picker::TimezonePicker;
