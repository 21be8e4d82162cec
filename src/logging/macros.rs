//! Call-site macros
//!
//! `info!(logger, a, b, c)` logs its arguments joined by single spaces.
//! `infof!(logger, "x={}", x)` takes a format string. Arguments are only
//! rendered when the level is enabled, and the caller fields point at the
//! macro invocation.

use std::fmt::{self, Write};

#[doc(hidden)]
pub fn join(parts: &[&dyn fmt::Display]) -> String {
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", part);
    }
    out
}

/// Log space-joined values at a runtime level
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, $($arg:expr),+ $(,)?) => {{
        let logger = &$logger;
        let level = $level;
        if logger.enabled(level) {
            logger.log(
                level,
                $crate::logging::macros::join(&[$(&$arg as &dyn ::core::fmt::Display),+]),
            );
        }
    }};
}

/// Log a formatted message at a runtime level
#[macro_export]
macro_rules! logf {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.logf($level, ::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::Level::Trace, $($arg),+)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::Level::Debug, $($arg),+)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::Level::Info, $($arg),+)
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::Level::Warn, $($arg),+)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $crate::log!($logger, $crate::Level::Error, $($arg),+)
    };
}

/// Log space-joined values, flush, and exit with status 1
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:expr),+ $(,)?) => {
        $logger.fatal($crate::logging::macros::join(&[$(&$arg as &dyn ::core::fmt::Display),+]))
    };
}

#[macro_export]
macro_rules! tracef {
    ($logger:expr, $($arg:tt)+) => {
        $logger.tracef(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! debugf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debugf(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! infof {
    ($logger:expr, $($arg:tt)+) => {
        $logger.infof(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warnf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warnf(::core::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.errorf(::core::format_args!($($arg)+))
    };
}

/// Formatted [`fatal!`]
#[macro_export]
macro_rules! fatalf {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatalf(::core::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::capture::CaptureWriter;
    use crate::{Level, Logger};
    use std::cell::Cell;

    fn logger(level: Level) -> (Logger, CaptureWriter) {
        let console = CaptureWriter::new();
        let logger = Logger::builder()
            .with_level(level)
            .with_console(console.clone())
            .build();
        (logger, console)
    }

    #[test]
    fn test_join() {
        assert_eq!(join(&[&"a", &1, &2.5]), "a 1 2.5");
        assert_eq!(join(&[&"only"]), "only");
        assert_eq!(join(&[&"", &"x"]), " x");
    }

    #[test]
    fn test_variadic_macros() {
        let (logger, console) = logger(Level::Trace);

        crate::trace!(logger, "t", 1);
        crate::debug!(logger, "d", 2);
        crate::info!(logger, "i", 3);
        crate::warn!(logger, "w", 4);
        crate::error!(logger, "e", 5,);

        let lines = console.lines();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains(" TRACE t 1 "));
        assert!(lines[1].contains(" DEBUG d 2 "));
        assert!(lines[2].contains(" INFO  i 3 "));
        assert!(lines[3].contains(" WARN  w 4 "));
        assert!(lines[4].contains(" ERROR e 5 "));
    }

    #[test]
    fn test_format_macros() {
        let (logger, console) = logger(Level::Trace);
        let user = "ada";

        crate::tracef!(logger, "t={}", 1);
        crate::debugf!(logger, "x={}", 5);
        crate::infof!(logger, "user={user}");
        crate::warnf!(logger, "{:>3}", 7);
        crate::errorf!(logger, "{:?}", "quoted");
        crate::logf!(logger, Level::Info, "runtime {}", "level");

        let lines = console.lines();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].contains(" TRACE t=1 "));
        assert!(lines[1].contains(" DEBUG x=5 "));
        assert!(lines[2].contains(" INFO  user=ada "));
        assert!(lines[3].contains(" WARN    7 "));
        assert!(lines[4].contains(" ERROR \"quoted\" "));
        assert!(lines[5].contains(" INFO  runtime level "));
    }

    #[test]
    fn test_macro_reports_invocation_site() {
        let (logger, console) = logger(Level::Info);

        crate::info!(logger, "from", "macro");
        let expected_line = line!() - 1;

        let line = &console.lines()[0];
        assert!(line.ends_with(&format!("from macro file=macros.rs line={}", expected_line)));
    }

    #[test]
    fn test_disabled_level_skips_argument_rendering() {
        struct Counted<'a>(&'a Cell<u32>);

        impl fmt::Display for Counted<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.set(self.0.get() + 1);
                f.write_str("counted")
            }
        }

        let (logger, console) = logger(Level::Error);
        let renders = Cell::new(0);

        crate::debug!(logger, Counted(&renders));
        crate::debugf!(logger, "{}", Counted(&renders));
        assert_eq!(renders.get(), 0);
        assert!(console.contents().is_empty());

        crate::error!(logger, Counted(&renders));
        assert_eq!(renders.get(), 1);
    }

    #[test]
    fn test_macro_accepts_logger_reference() {
        let (logger, console) = logger(Level::Info);
        let by_ref = &logger;

        crate::info!(by_ref, "via", "reference");
        crate::infof!(by_ref, "{}", "formatted");

        assert_eq!(console.lines().len(), 2);
    }
}
