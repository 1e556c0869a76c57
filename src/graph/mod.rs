pub mod item_dag;

pub use item_dag::ItemDag;
