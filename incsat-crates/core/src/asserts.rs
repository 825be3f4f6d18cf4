#[cfg(not(feature = "debug-checks"))]
pub const INCSAT_ASSERT_LEVEL_DEFINITION: u8 = INCSAT_ASSERT_SIMPLE;

#[cfg(feature = "debug-checks")]
pub const INCSAT_ASSERT_LEVEL_DEFINITION: u8 = INCSAT_ASSERT_ADVANCED;

pub const INCSAT_ASSERT_SIMPLE: u8 = 1;
pub const INCSAT_ASSERT_MODERATE: u8 = 2;
pub const INCSAT_ASSERT_ADVANCED: u8 = 3;
pub const INCSAT_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! incsat_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::INCSAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::INCSAT_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! incsat_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::INCSAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::INCSAT_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! incsat_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::INCSAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::INCSAT_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! incsat_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::INCSAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::INCSAT_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! incsat_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::INCSAT_ASSERT_LEVEL_DEFINITION >= $crate::asserts::INCSAT_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
