// People, projects and events: the browse/post side of NexusConnect.

pub mod forms;
pub mod handlers;
