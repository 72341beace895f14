pub mod reader;
pub mod writer;
pub mod types;
pub mod block;
pub mod blocks;
pub mod obstacle;
pub mod map_data;

pub use reader::BinaryReader;
pub use writer::{BinaryWriter, BlockWriter};
pub use types::*;
pub use block::{Block, BlockHeader, BlockReader, BlockType};
pub use obstacle::ObstacleCatalog;
pub use map_data::{MapData, MapHeader, parse_map_file};
