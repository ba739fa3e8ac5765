/// Input port: ask the user to confirm an irreversible action.
pub trait ConfirmPort: Send + Sync + 'static {
    fn confirm(&self, prompt: &str) -> bool;
}
