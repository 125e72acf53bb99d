pub mod background;
pub mod cycle;
pub mod page;

#[cfg(test)]
pub mod fakes;
