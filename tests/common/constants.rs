//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (user credentials, board fixtures, etc.),
//! update only this file.

// ============================================================================
// Test User Credentials
// ============================================================================

/// Pre-registered test user email
pub const TEST_EMAIL: &str = "hunter@example.com";

/// Pre-registered test user password
pub const TEST_PASS: &str = "testpass123";

/// Second pre-registered user, for cross-user scenarios
pub const OTHER_EMAIL: &str = "second@example.com";

/// Second pre-registered user password
pub const OTHER_PASS: &str = "otherpass123";

// ============================================================================
// Stub Job Board Fixtures
// ============================================================================

/// Board id of a vacancy the stub board can return a full text for
pub const BOARD_VACANCY_1_ID: &str = "hh-100";

/// Name of vacancy 1
pub const BOARD_VACANCY_1_NAME: &str = "Rust Developer";

/// Full text the stub board returns for vacancy 1
pub const BOARD_VACANCY_1_TEXT: &str = "We need a Rust developer with async experience.";

/// Board id of a vacancy the stub board has no full text for
pub const BOARD_VACANCY_2_ID: &str = "hh-200";

/// Name of vacancy 2
pub const BOARD_VACANCY_2_NAME: &str = "Backend Engineer";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Analysis delay configured for the test worker pool (milliseconds)
pub const TEST_ANALYSIS_DELAY_MS: u64 = 100;

/// Maximum time to wait for a match task to reach a terminal state (milliseconds)
pub const TASK_TERMINAL_TIMEOUT_MS: u64 = 3000;

/// Polling interval when waiting for a task result (milliseconds)
pub const TASK_POLL_INTERVAL_MS: u64 = 25;
