use catalog::StrainCatalog;
use lazy_static::lazy_static;

pub mod about;
pub mod catalog;
pub mod engine;
pub mod expansion;
pub mod graph_state;
pub mod lineage_svg;
pub mod render;
pub mod strain;

lazy_static! {
    // Builtin strain genetics catalog. Convenience for binaries and tests;
    // the engine itself always takes a catalog by injection.
    pub static ref CATALOG: StrainCatalog = StrainCatalog::default();
}
