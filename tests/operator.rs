#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        add in operator is OK
        "579"
        "string"
        ""
    }

    tests! {
        add_mixed in operator is ERR
        "Operands must be two numbers or two strings."
        "[line 1]"
    }

    tests! {
        add_bool in operator is ERR
        "Operands must be two numbers or two strings."
        "[line 1]"
    }

    tests! {
        arithmetic in operator is OK
        "1"
        "1"
        "15"
        "10"
        "4"
        "3.5"
    }

    tests! {
        divide_by_zero in operator is OK
        "inf"
    }

    tests! {
        negate in operator is OK
        "-3"
        "3"
        "-3"
    }

    tests! {
        negate_non_number in operator is ERR
        "Operand must be a number."
        "[line 1]"
    }

    tests! {
        subtract_non_numbers in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        compare_non_numbers in operator is ERR
        "Operands must be numbers."
        "[line 1]"
    }

    tests! {
        comparison in operator is OK
        "true"
        "false"
        "false"
        "true"
        "true"
        "false"
        "false"
        "false"
        "true"
        "false"
        "true"
        "true"
    }

    tests! {
        equality in operator is OK
        "true"
        "false"
        "true"
        "false"
        "false"
        "false"
    }
}
