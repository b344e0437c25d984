//! Scene synchronization with a remote render server
//!
//! The host describes its scene as meshes, instancing objects and a shader
//! table. `MeshManager` uploads whatever changed since the previous frame to
//! a `RenderServer` over a framed binary protocol.

pub mod config;
pub mod error;
pub mod network;
pub mod scene;
pub mod sync;

pub use config::ServerConfig;
pub use error::{BridgeError, BridgeResult};
pub use network::{PacketReader, PacketType, PacketWriter, RenderServer};
pub use scene::{
    AnimationMode, CurveData, Mesh, MeshId, MeshPolicy, MeshType, Object, Scene,
    SubdivisionParams, Visibility,
};
pub use sync::{MeshBatch, MeshEntry, MeshManager, Progress, SyncProgress, SyncReport};
