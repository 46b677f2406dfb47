pub mod client;
pub mod render;
pub mod repl;
pub mod session;

pub use client::{ ClientError, ProxyClient };
pub use render::{ ConsoleRenderer, Renderer };
pub use repl::{ ChatRepl, Flow, ReplError };
pub use session::ChatSession;
