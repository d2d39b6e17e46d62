//! Fixtures and macros shared by the unit tests


#[cfg(test)]
pub(crate) use fixtures::*;

/// Runs every listed test once per [`Frontier`](crate::algo::Frontier) strategy
macro_rules! test_frontier_variants {
    ($env:ident, |$frontier:ident| { $(fn $test:ident() $body:block)* }) => {
        #[cfg(test)]
        mod $env {
            use crate::{algo::*, prelude::*, testing::*};
            #[allow(unused_imports)]
            use itertools::Itertools;
            #[allow(unused_imports)]
            use rand::SeedableRng;

            $(
                mod $test {
                    use super::*;

                    #[test]
                    fn binary_heap() {
                        let $frontier = Frontier::BinaryHeap;
                        $body
                    }

                    #[test]
                    fn linear_scan() {
                        let $frontier = Frontier::LinearScan;
                        $body
                    }
                }
            )*
        }
    };
}

pub(crate) use test_frontier_variants;
