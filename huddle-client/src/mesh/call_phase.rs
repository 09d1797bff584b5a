/// Whether the local participant is in the call. Only media acquisition and
/// explicit user actions move this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallPhase {
    #[default]
    Idle,
    InCall,
}
