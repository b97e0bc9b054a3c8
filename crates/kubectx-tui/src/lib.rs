pub mod picker;
pub mod widgets;

pub use picker::{PickMode, PickOutcome, PickerState, TuiPicker};
