#[macro_use]
mod common;

#[cfg(test)]
mod misc {
    tests! {
        empty_file in misc is OK
    }

    tests! {
        precedence in misc is OK
        "14"
        "8"
        "4"
        "0"
        "true"
        "true"
        "true"
        "true"
        "0"
        "0"
        "0"
        "0"
        "4"
    }

    tests! {
        unexpected_character in misc is ERR
        "[line 1] Error: Unexpected character '|'"
    }

    tests! {
        bare_semicolon in misc is ERR
        "[line 1] Error at ';': Expect expression"
    }

    tests! {
        print_missing_expression in misc is ERR
        "[line 1] Error at ';': Expect expression"
    }
}
