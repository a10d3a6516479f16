use alloy::sol;

// ─── Bonding-Curve Viewer ───────────────────────────────────────────────────
//
// All uint256 amounts are fixed-point with 18 fractional decimals.
// Unregistered tokens report all-zero state.
sol! {
    #[allow(missing_docs)]
    #[derive(Debug, PartialEq, Eq)]
    #[sol(rpc)]
    contract CurveViewer {
        function curveState(address token)
            external
            view
            returns (uint256 tvl, uint256 totalSupply, uint256 spotPrice);

        function curveStates(address[] calldata tokens)
            external
            view
            returns (
                uint256[] memory tvls,
                uint256[] memory totalSupplies,
                uint256[] memory spotPrices
            );
    }
}
