mod call_phase;
mod coordinator;
mod mesh_command;
mod mesh_config;
mod mesh_handle;
mod mesh_view;
mod remote_stream_record;

pub use call_phase::CallPhase;
pub use coordinator::MeshCoordinator;
pub use mesh_command::MeshCommand;
pub use mesh_config::{InitiatorPolicy, MeshConfig};
pub use mesh_handle::MeshHandle;
pub use mesh_view::MeshView;
pub use remote_stream_record::RemoteStreamRecord;
