// Anthropic provider for the Soiree guest assistant

mod client;

pub use client::AnthropicClient;

#[cfg(test)]
mod tests;
