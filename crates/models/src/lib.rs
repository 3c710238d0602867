pub mod errors;
pub mod db;
pub mod api_call;

#[cfg(test)]
mod tests;
