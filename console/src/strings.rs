macro_rules! define_strings {
    (
        $($name:ident = $value:literal);*$(;)?
    ) => {
        $(
            pub const $name: &str = $value;
        )*
    };
}

pub mod common {
    define_strings! {
        INPUT =
            "Input GTF file.";
        OUTPUT =
            "Output GTF file. Written to stdout when omitted.";
        BEDTOOLS =
            "Cluster spans with `bedtools cluster` instead of the built-in \
            interval clustering. bedtools must be on PATH.";
    }
}

pub mod fix_coords {
    define_strings! {
        ABOUT =
            "Infer model lengths and correct the model coordinates of \
            RepeatMasker hits.";
    }
}

pub mod merge_hits {
    define_strings! {
        ABOUT =
            "Merge internal-region hits into candidate loci.";
        SHORT_DIST =
            "Hits separated by at most this many bases are merged \
            unconditionally.";
        LONG_DIST =
            "Hits separated by more than this many bases are never merged. \
            In between, hits are merged when they continue along the model.";
        PREFIX =
            "Prefix of generated locus ids (PREFIX_0001, PREFIX_0002, ...). \
            Must not contain '-', '+', ',' or whitespace, which separate \
            locus ids in resolution commands.";
    }
}

pub mod assemble {
    define_strings! {
        ABOUT =
            "Build loci from locus-tagged hits and flanking LTR hits.";
        LTR =
            "Output of `bedtools intersect -wo` pairing locus records with \
            LTR hits. Each LTR hit joins the locus of its partner record.";
    }
}

pub mod overlaps {
    define_strings! {
        ABOUT =
            "List groups of overlapping loci and optionally record a \
            resolution command for each.";
        INTERACTIVE =
            "Ask for a resolution command for every overlap group.";
        RESOLVE_FILE =
            "Write the recorded commands to this JSON file. Printed to stdout \
            when omitted.";
    }
}

pub mod polish {
    define_strings! {
        ABOUT =
            "Resolve overlapping loci with ignore/reject/diff/merge commands.";
        RESOLVE =
            "Resolution commands as JSON text, e.g. \
            '{\"1\": [\"reject\", \"locus_0002\"]}'.";
        RESOLVE_FILE =
            "JSON file with resolution commands.";
        KEEP_EMPTY_FAIL =
            "Fail when a diff removes every record of a locus instead of \
            dropping the locus.";
        SAVE_COMMANDS =
            "Write every applied command, including interactive ones, to \
            this JSON file.";
    }
}

pub mod filter {
    define_strings! {
        ABOUT =
            "Keep loci that cover enough of their internal model.";
        REJECT =
            "Write rejected loci to this GTF file.";
        MIN_INTERNAL_BASES =
            "Minimum number of internal model bases covered.";
        MIN_INTERNAL_PCT =
            "Minimum fraction (0-1) of the internal model covered.";
    }
}
