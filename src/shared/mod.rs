pub mod constants;
pub mod retry;
#[cfg(test)]
pub mod test_helpers;
pub mod types;
