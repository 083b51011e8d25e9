//! Parsing of the positional `/proc/<pid>/stat` record.
//!
//! The record layout follows the kernel's documented stat table
//! (https://www.kernel.org/doc/html/latest/filesystems/proc.html, table 1-4).
//! Tokens are mapped to fields strictly by position. Fields the kernel may
//! append in the future are ignored, so known offsets never move.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// File name of the stat record inside a process directory.
pub const STAT_FILE: &str = "stat";

/// Number of positional fields understood by [`parse_stat`].
pub const STAT_FIELD_COUNT: usize = 52;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    100.0
}

/// System clock ticks per second, used to convert the tick counters below.
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// A process's stat record as reported by the kernel.
///
/// Memory segment boundaries are kept as `0x`-prefixed hexadecimal strings,
/// every other numeric field is zero when the kernel token did not parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStat {
    /// Process ID (`pid`).
    pub id: u32,
    /// Executable file name including the surrounding parentheses (`tcomm`).
    /// The kernel truncates it and processes may rename themselves via
    /// prctl, so it is not a reliable executable name.
    pub file_name: String,
    /// Single character run state (R, S, D, Z, T, t, X, I, ...).
    pub state: String,
    /// Parent process ID (`ppid`).
    pub parent_id: u32,
    /// Process group ID (`pgrp`).
    pub process_group: i64,
    /// Session ID (`sid`).
    pub session_id: i64,
    /// Controlling terminal (`tty_nr`), 0 when detached.
    pub tty: i64,
    /// Foreground process group of the terminal (`tty_pgrp`), -1 when none.
    pub tty_process_group: i64,
    /// Task flags, raw decimal token.
    pub task_flags: String,
    /// Minor page faults (`min_flt`).
    pub minor_faults: u64,
    /// Minor page faults of waited-for children (`cmin_flt`).
    pub minor_faults_children: u64,
    /// Major page faults (`maj_flt`).
    pub major_faults: u64,
    /// Major page faults of waited-for children (`cmaj_flt`).
    pub major_faults_children: u64,
    /// Ticks spent in user mode (`utime`).
    pub user_time: u64,
    /// Ticks spent in kernel mode (`stime`).
    pub kernel_time: u64,
    /// User mode ticks of waited-for children (`cutime`).
    pub user_time_children: i64,
    /// Kernel mode ticks of waited-for children (`cstime`).
    pub kernel_time_children: i64,
    /// Kernel scheduling priority.
    pub priority: i64,
    /// Nice value.
    pub nice: i64,
    /// Number of threads (`num_threads`).
    pub thread_count: i64,
    /// Obsolete interval timer, always 0 on modern kernels (`it_real_value`).
    pub it_real_value: i64,
    /// Ticks after boot when the process started (`start_time`).
    pub start_time: u64,
    /// Virtual memory size in bytes (`vsize`).
    pub virtual_mem_size: u64,
    /// Resident set size in pages (`rss`).
    pub resident_set_size: i64,
    /// Resident set limit in bytes (`rsslim`).
    pub rss_limit: u64,
    pub start_code: String,
    pub end_code: String,
    pub start_stack: String,
    /// Current stack pointer (`esp`), only populated for traced tasks.
    pub stack_pointer: u64,
    /// Current instruction pointer (`eip`), only populated for traced tasks.
    pub instruction_pointer: u64,
    /// Bitmap of pending signals.
    pub signals_pending: u64,
    /// Bitmap of blocked signals.
    pub signals_blocked: u64,
    /// Bitmap of ignored signals.
    pub signals_ignored: u64,
    /// Bitmap of caught signals.
    pub signals_caught: u64,
    /// Former wchan address, now a placeholder (see `/proc/<pid>/wchan`).
    pub wchan_placeholder: u64,
    /// Placeholder (`nswap`).
    pub swapped_pages: u64,
    /// Placeholder (`cnswap`).
    pub swapped_pages_children: u64,
    /// Signal sent to the parent when this process exits.
    pub exit_signal: i32,
    /// CPU the task last ran on (`task_cpu`).
    pub cpu: i32,
    /// Realtime priority (`rt_priority`).
    pub realtime_priority: u32,
    /// Scheduling policy (0 normal, 1 fifo, 2 rr, 3 batch, 5 idle, 6 deadline).
    pub scheduling_policy: u32,
    /// Aggregated block I/O delay in ticks (`blkio_ticks`).
    pub block_io_ticks: u64,
    /// Guest time in ticks (`gtime`).
    pub guest_time: u64,
    /// Guest time of waited-for children (`cgtime`).
    pub guest_time_children: i64,
    pub start_data: String,
    pub end_data: String,
    /// Start of the heap (`start_brk`).
    pub heap_start: String,
    pub arg_start: String,
    pub arg_end: String,
    pub env_start: String,
    pub env_end: String,
    /// Exit code as reported by waitpid.
    pub exit_code: i32,
}

impl ProcessStat {
    /// Total CPU time (user + kernel) in seconds.
    pub fn cpu_time_seconds(&self) -> f64 {
        (self.user_time + self.kernel_time) as f64 / *CLK_TCK
    }

    /// Human readable form of the run state.
    pub fn state_description(&self) -> &'static str {
        match self.state.as_str() {
            "R" => "running",
            "S" => "sleeping",
            "D" => "disk sleep",
            "Z" => "zombie",
            "T" => "stopped",
            "t" => "tracing stop",
            "X" | "x" => "dead",
            "K" => "wakekill",
            "W" => "waking",
            "P" => "parked",
            "I" => "idle",
            _ => "unknown",
        }
    }

    /// Serializes the record back into the positional kernel layout.
    ///
    /// Addresses are written in decimal as the kernel does, so parsing the
    /// result yields an equal `ProcessStat`.
    pub fn to_stat_line(&self) -> String {
        let tokens: [String; STAT_FIELD_COUNT] = [
            self.id.to_string(),
            self.file_name.clone(),
            self.state.clone(),
            self.parent_id.to_string(),
            self.process_group.to_string(),
            self.session_id.to_string(),
            self.tty.to_string(),
            self.tty_process_group.to_string(),
            self.task_flags.clone(),
            self.minor_faults.to_string(),
            self.minor_faults_children.to_string(),
            self.major_faults.to_string(),
            self.major_faults_children.to_string(),
            self.user_time.to_string(),
            self.kernel_time.to_string(),
            self.user_time_children.to_string(),
            self.kernel_time_children.to_string(),
            self.priority.to_string(),
            self.nice.to_string(),
            self.thread_count.to_string(),
            self.it_real_value.to_string(),
            self.start_time.to_string(),
            self.virtual_mem_size.to_string(),
            self.resident_set_size.to_string(),
            self.rss_limit.to_string(),
            decimal_address(&self.start_code),
            decimal_address(&self.end_code),
            decimal_address(&self.start_stack),
            self.stack_pointer.to_string(),
            self.instruction_pointer.to_string(),
            self.signals_pending.to_string(),
            self.signals_blocked.to_string(),
            self.signals_ignored.to_string(),
            self.signals_caught.to_string(),
            self.wchan_placeholder.to_string(),
            self.swapped_pages.to_string(),
            self.swapped_pages_children.to_string(),
            self.exit_signal.to_string(),
            self.cpu.to_string(),
            self.realtime_priority.to_string(),
            self.scheduling_policy.to_string(),
            self.block_io_ticks.to_string(),
            self.guest_time.to_string(),
            self.guest_time_children.to_string(),
            decimal_address(&self.start_data),
            decimal_address(&self.end_data),
            decimal_address(&self.heap_start),
            decimal_address(&self.arg_start),
            decimal_address(&self.arg_end),
            decimal_address(&self.env_start),
            decimal_address(&self.env_end),
            self.exit_code.to_string(),
        ];
        tokens.join(" ")
    }
}

/// Splits a stat record into positional tokens.
///
/// The file name token spans from the first `(` to the last `)` and is kept
/// whole, so names containing spaces or parentheses do not shift the fields
/// that follow it.
fn split_fields(record: &str) -> Vec<&str> {
    let record = record.trim_end_matches(['\n', '\0', ' ']);
    match (record.find('('), record.rfind(')')) {
        (Some(open), Some(close)) if open < close => {
            let mut fields: Vec<&str> = record[..open].split_whitespace().collect();
            fields.push(&record[open..=close]);
            fields.extend(record[close + 1..].split_whitespace());
            fields
        }
        _ => record.split_whitespace().collect(),
    }
}

fn num<T: FromStr + Default>(fields: &[&str], idx: usize) -> T {
    fields
        .get(idx)
        .and_then(|s| s.parse().ok())
        .unwrap_or_default()
}

fn text(fields: &[&str], idx: usize) -> String {
    fields.get(idx).map(|s| s.to_string()).unwrap_or_default()
}

/// Converts a decimal address token into `0x` notation. Absent tokens stay empty.
fn hex_address(fields: &[&str], idx: usize) -> String {
    match fields.get(idx) {
        Some(_) => format!("{:#x}", num::<u64>(fields, idx)),
        None => String::new(),
    }
}

fn decimal_address(addr: &str) -> String {
    let digits = addr.trim_start_matches("0x");
    u64::from_str_radix(digits, 16).unwrap_or(0).to_string()
}

/// Parses a raw stat record. Never fails: an empty or malformed record gives
/// a zero-value `ProcessStat`.
pub fn parse_stat(raw: &[u8]) -> ProcessStat {
    let record = String::from_utf8_lossy(raw);
    let f = split_fields(&record);

    ProcessStat {
        id: num(&f, 0),
        file_name: text(&f, 1),
        state: text(&f, 2),
        parent_id: num(&f, 3),
        process_group: num(&f, 4),
        session_id: num(&f, 5),
        tty: num(&f, 6),
        tty_process_group: num(&f, 7),
        task_flags: text(&f, 8),
        minor_faults: num(&f, 9),
        minor_faults_children: num(&f, 10),
        major_faults: num(&f, 11),
        major_faults_children: num(&f, 12),
        user_time: num(&f, 13),
        kernel_time: num(&f, 14),
        user_time_children: num(&f, 15),
        kernel_time_children: num(&f, 16),
        priority: num(&f, 17),
        nice: num(&f, 18),
        thread_count: num(&f, 19),
        it_real_value: num(&f, 20),
        start_time: num(&f, 21),
        virtual_mem_size: num(&f, 22),
        resident_set_size: num(&f, 23),
        rss_limit: num(&f, 24),
        start_code: hex_address(&f, 25),
        end_code: hex_address(&f, 26),
        start_stack: hex_address(&f, 27),
        stack_pointer: num(&f, 28),
        instruction_pointer: num(&f, 29),
        signals_pending: num(&f, 30),
        signals_blocked: num(&f, 31),
        signals_ignored: num(&f, 32),
        signals_caught: num(&f, 33),
        wchan_placeholder: num(&f, 34),
        swapped_pages: num(&f, 35),
        swapped_pages_children: num(&f, 36),
        exit_signal: num(&f, 37),
        cpu: num(&f, 38),
        realtime_priority: num(&f, 39),
        scheduling_policy: num(&f, 40),
        block_io_ticks: num(&f, 41),
        guest_time: num(&f, 42),
        guest_time_children: num(&f, 43),
        start_data: hex_address(&f, 44),
        end_data: hex_address(&f, 45),
        heap_start: hex_address(&f, 46),
        arg_start: hex_address(&f, 47),
        arg_end: hex_address(&f, 48),
        env_start: hex_address(&f, 49),
        env_end: hex_address(&f, 50),
        exit_code: num(&f, 51),
    }
}

/// Reads and parses `<proc_path>/stat`.
pub fn read_stat_file(proc_path: &Path) -> Result<ProcessStat, std::io::Error> {
    let raw = fs::read(proc_path.join(STAT_FILE))?;
    Ok(parse_stat(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const STAT_THUNAR: &str = "1002 (Thunar) S 898 898 898 0 -1 4194304 9075 31619 19 0 242 54 42 7 20 0 3 0 4316 499617792 14545 18446744073709551615 94657007656960 94657008059597 140727172487872 0 0 0 0 4096 0 0 0 0 17 10 0 0 0 0 0 94657008206176 94657008240992 94657028120576 140727172496280 140727172496349 140727172496349 140727172497384 0";
    const STAT_CHROMIUM: &str = "68657 (chromium) S 68654 68650 68650 0 -1 4194560 1462096 116023 16 0 13834 4693 47 34 20 0 23 0 7679775 35172757504 80617 18446744073709551615 94708279918592 94708471088624 140731884479632 0 0 0 0 4096 1098990847 0 0 0 17 0 0 0 0 0 0 94708479643648 94708480167272 94708482572288 140731884485166 140731884485225 140731884485225 140731884486621 0";

    // -------------------------------------------------------------------------
    // Tests for parse_stat
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_stat_thunar() {
        let stat = parse_stat(STAT_THUNAR.as_bytes());

        assert_eq!(stat.id, 1002);
        assert_eq!(stat.file_name, "(Thunar)");
        assert_eq!(stat.state, "S");
        assert_eq!(stat.parent_id, 898);
        assert_eq!(stat.process_group, 898);
        assert_eq!(stat.session_id, 898);
        assert_eq!(stat.tty, 0);
        assert_eq!(stat.tty_process_group, -1);
        assert_eq!(stat.task_flags, "4194304");
        assert_eq!(stat.minor_faults, 9075);
        assert_eq!(stat.user_time, 242);
        assert_eq!(stat.kernel_time, 54);
        assert_eq!(stat.priority, 20);
        assert_eq!(stat.thread_count, 3);
        assert_eq!(stat.start_time, 4316);
        assert_eq!(stat.virtual_mem_size, 499617792);
        assert_eq!(stat.resident_set_size, 14545);
        assert_eq!(stat.rss_limit, u64::MAX);
        assert_eq!(stat.start_code, "0x56170d512000");
        assert_eq!(stat.signals_ignored, 4096);
        assert_eq!(stat.exit_signal, 17);
        assert_eq!(stat.cpu, 10);
        assert_eq!(stat.exit_code, 0);
    }

    #[test]
    fn test_parse_stat_chromium() {
        let stat = parse_stat(STAT_CHROMIUM.as_bytes());

        assert_eq!(stat.id, 68657);
        assert_eq!(stat.file_name, "(chromium)");
        assert_eq!(stat.parent_id, 68654);
        assert_eq!(stat.thread_count, 23);
        assert_eq!(stat.signals_caught, 1098990847);
    }

    #[test]
    fn test_parse_stat_file_name_with_spaces() {
        let record = STAT_THUNAR.replace("(Thunar)", "(tmux: server)");
        let stat = parse_stat(record.as_bytes());

        assert_eq!(stat.file_name, "(tmux: server)");
        assert_eq!(stat.state, "S");
        assert_eq!(stat.parent_id, 898);
        assert_eq!(stat.exit_signal, 17);
    }

    #[test]
    fn test_parse_stat_file_name_with_parentheses() {
        let record = STAT_THUNAR.replace("(Thunar)", "(evil) R 1 (x)");
        let stat = parse_stat(record.as_bytes());

        assert_eq!(stat.file_name, "(evil) R 1 (x)");
        assert_eq!(stat.state, "S");
        assert_eq!(stat.parent_id, 898);
    }

    #[test]
    fn test_parse_stat_trailing_newline() {
        let record = format!("{}\n", STAT_THUNAR);
        let stat = parse_stat(record.as_bytes());
        assert_eq!(stat.exit_code, 0);
        assert_eq!(stat.env_end, "0x7ffd99207fe8");
    }

    #[test]
    fn test_parse_stat_tolerates_extra_fields() {
        let record = format!("{} 99 100 101\n", STAT_THUNAR);
        let stat = parse_stat(record.as_bytes());

        assert_eq!(stat, parse_stat(STAT_THUNAR.as_bytes()));
    }

    #[test]
    fn test_parse_stat_short_record() {
        let stat = parse_stat(b"1234 (test) S 1 2 3");

        assert_eq!(stat.id, 1234);
        assert_eq!(stat.parent_id, 1);
        assert_eq!(stat.session_id, 3);
        assert_eq!(stat.tty, 0);
        assert_eq!(stat.start_code, "");
        assert_eq!(stat.task_flags, "");
    }

    #[test]
    fn test_parse_stat_empty_and_garbage() {
        assert_eq!(parse_stat(b""), ProcessStat::default());
        assert_eq!(parse_stat(b"   \n"), ProcessStat::default());

        let stat = parse_stat(b"abc (x) S notanumber");
        assert_eq!(stat.id, 0);
        assert_eq!(stat.file_name, "(x)");
        assert_eq!(stat.parent_id, 0);
    }

    #[test]
    fn test_stat_line_round_trip() {
        for record in [STAT_THUNAR, STAT_CHROMIUM] {
            let stat = parse_stat(record.as_bytes());
            assert_eq!(stat.to_stat_line(), record);
            assert_eq!(parse_stat(stat.to_stat_line().as_bytes()), stat);
        }
    }

    #[test]
    fn test_state_description() {
        let stat = parse_stat(STAT_THUNAR.as_bytes());
        assert_eq!(stat.state_description(), "sleeping");
        assert_eq!(ProcessStat::default().state_description(), "unknown");
    }

    // -------------------------------------------------------------------------
    // Tests for read_stat_file
    // -------------------------------------------------------------------------

    #[test]
    fn test_read_stat_file() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::fs::write(dir.path().join(STAT_FILE), STAT_CHROMIUM)
            .expect("Failed to write stat file");

        let stat = read_stat_file(dir.path()).expect("stat should be readable");
        assert_eq!(stat.id, 68657);

        let expected = (13834.0 + 4693.0) / *CLK_TCK;
        assert!((stat.cpu_time_seconds() - expected).abs() < 0.001);
    }

    #[test]
    fn test_read_stat_file_missing() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(read_stat_file(dir.path()).is_err());
    }
}
