//! Support routines linked into the generated program on demand. Both only touch
//! `$a0`-`$a3` and `$v0`-`$v1`, so callers' temporaries survive the call.

pub const CONCAT_STRINGS: &str = "concat_strings";
pub const COMPARE_STRINGS: &str = "compare_strings";

/// `$v0` = new heap string holding `$a0` followed by `$a1`.
pub const CONCAT_STRINGS_ROUTINE: &[&str] = &[
    "concat_strings:",
    "move $a2, $a0",
    "move $a3, $a1",
    "li $v1, 1",
    "concat_strings_len_a:",
    "lb $v0, 0($a0)",
    "beq $v0, $zero, concat_strings_len_b",
    "addi $v1, $v1, 1",
    "addi $a0, $a0, 1",
    "j concat_strings_len_a",
    "concat_strings_len_b:",
    "lb $v0, 0($a1)",
    "beq $v0, $zero, concat_strings_alloc",
    "addi $v1, $v1, 1",
    "addi $a1, $a1, 1",
    "j concat_strings_len_b",
    "concat_strings_alloc:",
    "move $a0, $v1",
    "li $v0, 9",
    "syscall",
    "move $v1, $v0",
    "concat_strings_copy_a:",
    "lb $a0, 0($a2)",
    "beq $a0, $zero, concat_strings_copy_b",
    "sb $a0, 0($v1)",
    "addi $a2, $a2, 1",
    "addi $v1, $v1, 1",
    "j concat_strings_copy_a",
    "concat_strings_copy_b:",
    "lb $a0, 0($a3)",
    "sb $a0, 0($v1)",
    "beq $a0, $zero, concat_strings_done",
    "addi $a3, $a3, 1",
    "addi $v1, $v1, 1",
    "j concat_strings_copy_b",
    "concat_strings_done:",
    "jr $ra",
];

/// `$v0` = 1 if the strings at `$a0` and `$a1` are equal, else 0.
pub const COMPARE_STRINGS_ROUTINE: &[&str] = &[
    "compare_strings:",
    "lb $a2, 0($a0)",
    "lb $a3, 0($a1)",
    "bne $a2, $a3, compare_strings_differ",
    "beq $a2, $zero, compare_strings_equal",
    "addi $a0, $a0, 1",
    "addi $a1, $a1, 1",
    "j compare_strings",
    "compare_strings_equal:",
    "li $v0, 1",
    "jr $ra",
    "compare_strings_differ:",
    "li $v0, 0",
    "jr $ra",
];
