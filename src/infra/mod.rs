pub mod clipboard;
pub mod endpoint;
pub mod file_page;
pub mod http_page;
pub mod llm;
pub mod settle;

#[cfg(test)]
pub mod test_server;
