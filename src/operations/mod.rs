mod graph_dist;
mod normalize;
mod normals;

pub use graph_dist::{DistanceField, FieldType, GraphDist};
pub use normalize::NormalizePositions;
pub use normals::{ComputeFaceNormals, ComputeVertexAndFaceNormals};
