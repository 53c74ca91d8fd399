//! Shared fixtures for integration tests.
#![allow(dead_code)]

use labsim::engine::Submission;
use labsim::similarity::Language;

/// Baseline C submission.
pub const PROGRAM_A: &str = r#"#include <stdio.h>

int sum(int *values, int count) {
    int total = 0;
    for (int i = 0; i < count; i++) {
        total += values[i];
    }
    return total;
}

int max(int *values, int count) {
    int best = values[0];
    for (int i = 1; i < count; i++) {
        if (values[i] > best) {
            best = values[i];
        }
    }
    return best;
}

int main(void) {
    int data[5] = {3, 1, 4, 1, 5};
    printf("%d %d\n", sum(data, 5), max(data, 5));
    return 0;
}
"#;

/// `PROGRAM_A` with two locals renamed. Scores 72.82 against it.
pub const PROGRAM_B: &str = r#"#include <stdio.h>

int sum(int *values, int count) {
    int acc = 0;
    for (int i = 0; i < count; i++) {
        acc += values[i];
    }
    return acc;
}

int max(int *values, int count) {
    int top = values[0];
    for (int i = 1; i < count; i++) {
        if (values[i] > top) {
            top = values[i];
        }
    }
    return top;
}

int main(void) {
    int data[5] = {3, 1, 4, 1, 5};
    printf("%d %d\n", sum(data, 5), max(data, 5));
    return 0;
}
"#;

/// Shares `sum` and `main` with `PROGRAM_A` under other parameter names.
/// Scores 55.25 against `PROGRAM_A` and 48.68 against `PROGRAM_B`.
pub const PROGRAM_C: &str = r#"#include <stdio.h>

int sum(int *arr, int len) {
    int total = 0;
    for (int i = 0; i < len; i++) {
        total += arr[i];
    }
    return total;
}

void print_all(int *arr, int len) {
    for (int i = 0; i < len; i++) {
        printf("%d\n", arr[i]);
    }
}

int main(void) {
    int data[5] = {3, 1, 4, 1, 5};
    printf("%d %d\n", sum(data, 5), max(data, 5));
    return 0;
}
"#;

/// A longer C submission for rename robustness checks.
pub const ACCOUNTS_PROGRAM: &str = r#"#include <stdio.h>
#include <stdlib.h>

typedef struct {
    int id;
    double balance;
} account_t;

static double total_balance(const account_t *accounts, int n) {
    double sum = 0.0;
    for (int i = 0; i < n; i++) {
        sum += accounts[i].balance;
    }
    return sum;
}

static int find_account(const account_t *accounts, int n, int id) {
    for (int i = 0; i < n; i++) {
        if (accounts[i].id == id) {
            return i;
        }
    }
    return -1;
}

static void deposit(account_t *accounts, int n, int id, double amount) {
    int index = find_account(accounts, n, id);
    if (index >= 0 && amount > 0) {
        accounts[index].balance += amount;
    }
}

int main(void) {
    account_t accounts[3] = {{1, 10.0}, {2, 25.5}, {3, 0.0}};
    deposit(accounts, 3, 2, 4.5);
    deposit(accounts, 3, 9, 1.0);
    printf("total: %.2f\n", total_balance(accounts, 3));
    return 0;
}
"#;

/// Python submission with no token in common with the C fixtures.
pub const PYTHON_PROGRAM: &str = "def greet(name):\n    return f'hi {name}'\n\nprint(greet('ada'))\n";

/// Build a submission.
pub fn submission(
    id: &str,
    author: &str,
    language: Language,
    source: &str,
    score: Option<f64>,
) -> Submission {
    Submission {
        id: id.to_owned(),
        author_id: author.to_owned(),
        source_code: source.to_owned(),
        language,
        score,
    }
}

/// The three-author C lab: `a` vs `b` is flagged, `a` vs `c` is retained, `b` vs `c` is dropped.
pub fn three_author_lab() -> Vec<Submission> {
    vec![
        submission("sub-a", "alice", Language::C, PROGRAM_A, Some(85.0)),
        submission("sub-b", "bob", Language::C, PROGRAM_B, Some(55.0)),
        submission("sub-c", "carol", Language::C, PROGRAM_C, Some(10.0)),
    ]
}
