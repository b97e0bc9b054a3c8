use anyhow::Result;

/// Interactive selection of contexts. `Ok(None)` means the user backed out.
pub trait Picker {
    fn pick_context(&mut self, contexts: &[String], current: &str) -> Result<Option<String>>;
    fn pick_contexts_to_delete(&mut self, contexts: &[String], current: &str) -> Result<Option<Vec<String>>>;
}
