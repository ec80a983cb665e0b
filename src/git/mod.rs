pub mod repo;
pub mod worktree;

pub use repo::GitRepo;
pub use worktree::WorkingTree;
