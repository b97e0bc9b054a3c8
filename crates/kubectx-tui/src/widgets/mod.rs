mod context_picker;

pub use context_picker::ContextPickerWidget;
